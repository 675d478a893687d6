#![cfg(unix)]

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    temp_dir: TempDir,
}

impl Env {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("home"))?;
        Ok(Self { temp_dir })
    }

    fn home(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }

    fn backup_dir(&self) -> PathBuf {
        self.home().join(".bk")
    }

    fn write(&self, rel: &str, content: &str) -> Result<PathBuf> {
        let path = self.home().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    fn cmd(&self) -> Result<Command> {
        let mut cmd = Command::cargo_bin("cfgvault")?;
        cmd.current_dir(self.home())
            .env("HOME", self.home())
            .env("CFGVAULT_CONFIG_PATH", self.temp_dir.path().join("config.toml"))
            .env("CFGVAULT_BACKUP_DIR", self.backup_dir())
            .env_remove("CFGVAULT_LOG")
            .arg("--yes");
        Ok(cmd)
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

#[test]
fn test_backup_list_delete_cycle() -> Result<()> {
    let env = Env::new()?;
    let bashrc = env.write(".bashrc", "export PATH\n")?;

    env.cmd()?
        .args(["backup", bashrc.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Backed up 1 file"));
    assert!(is_symlink(&bashrc));

    env.cmd()?
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("~/.bashrc"));

    env.cmd()?
        .args(["delete", "--restore", "~/.bashrc"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Restored and deleted 1 backup"));
    assert!(!is_symlink(&bashrc));
    assert_eq!(fs::read_to_string(&bashrc)?, "export PATH\n");

    env.cmd()?
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("No tracked files"));
    Ok(())
}

#[test]
fn test_backup_walks_current_directory() -> Result<()> {
    let env = Env::new()?;
    env.write(".vimrc", "set nu")?;
    env.write(".config/kitty/kitty.conf", "font_size 11")?;
    env.write("notes.txt", "not a config")?;

    env.cmd()?
        .args(["backup", "-p", "**/.*", "-p", "**/*.conf"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Backed up 2 files"));

    assert!(is_symlink(&env.home().join(".vimrc")));
    assert!(is_symlink(&env.home().join(".config/kitty/kitty.conf")));
    assert!(!is_symlink(&env.home().join("notes.txt")));
    assert!(env.backup_dir().join("cfgvaultmap.yaml").is_file());
    Ok(())
}

#[test]
fn test_backup_with_replicate_builds_tree() -> Result<()> {
    let env = Env::new()?;
    let path = env.write(".config/git/config", "[user]\n")?;

    env.cmd()?
        .args(["backup", path.to_str().unwrap(), "--replicate"])
        .assert()
        .success();

    let replica = env.backup_dir().join("home/.config/git/config");
    assert_eq!(fs::read_to_string(replica)?, "[user]\n");
    assert!(fs::read_link(&path)?.starts_with(env.backup_dir().join(".internals")));
    Ok(())
}

#[test]
fn test_replicate_clean_and_delete_by_glob() -> Result<()> {
    let env = Env::new()?;
    let a = env.write(".config/a.toml", "a")?;
    let b = env.write(".config/b.toml", "b")?;
    env.cmd()?
        .args(["backup", a.to_str().unwrap(), b.to_str().unwrap()])
        .assert()
        .success();

    env.cmd()?
        .args(["replicate", "--all", "--clean"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Replicated 2 files"));
    assert!(env.backup_dir().join("home/.config/a.toml").is_file());

    env.cmd()?
        .args(["delete", ".config/*.toml"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Deleted 2 backups"));
    assert!(fs::symlink_metadata(&a).is_err());
    assert!(fs::symlink_metadata(&b).is_err());
    Ok(())
}

#[test]
fn test_restore_and_tidy() -> Result<()> {
    let env = Env::new()?;
    let kept = env.write(".inputrc", "set bell-style none")?;
    let lost = env.write(".lost", "gone")?;
    env.cmd()?
        .args(["backup", kept.to_str().unwrap(), lost.to_str().unwrap()])
        .assert()
        .success();

    fs::remove_file(&kept)?;
    let blob = fs::read_link(&lost)?;
    fs::remove_file(&blob)?;

    env.cmd()?
        .args(["restore", "--all"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Restored 1 file"));
    assert_eq!(fs::read_to_string(&kept)?, "set bell-style none");

    env.cmd()?
        .arg("tidy")
        .assert()
        .success()
        .stderr(predicate::str::contains("already tidy"));
    Ok(())
}

#[test]
fn test_backup_missing_path_fails() -> Result<()> {
    let env = Env::new()?;
    env.cmd()?
        .args(["backup", "does-not-exist"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("Path does not exist"));
    Ok(())
}

#[test]
fn test_backup_skips_symlinks() -> Result<()> {
    let env = Env::new()?;
    let target = env.write("real.conf", "x")?;
    let link = env.home().join(".link");
    std::os::unix::fs::symlink(&target, &link)?;

    env.cmd()?
        .args(["backup", link.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping symlink"))
        .stderr(predicate::str::contains("No files to back up"));
    Ok(())
}

#[test]
fn test_config_get_set() -> Result<()> {
    let env = Env::new()?;
    env.cmd()?
        .args(["config", "core.map_file"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cfgvaultmap.yaml"));

    env.cmd()?
        .args(["config", "git.branch", "main"])
        .assert()
        .success();
    env.cmd()?
        .args(["config", "--list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[git]"))
        .stdout(predicate::str::contains("branch = main"));

    env.cmd()?
        .args(["config", "core.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
    Ok(())
}

#[test]
fn test_setup_saves_config_and_seeds_ignore_file() -> Result<()> {
    let env = Env::new()?;
    env.cmd()?
        .arg("setup")
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved"));

    let config = fs::read_to_string(env.temp_dir.path().join("config.toml"))?;
    assert!(config.contains(&env.backup_dir().display().to_string()));
    assert!(config.contains("cfgvaultmap.yaml"));
    assert!(env.backup_dir().join(".cfgvaultignore").is_file());

    env.cmd()?
        .args(["config", "core.backup_dir"])
        .env_remove("CFGVAULT_BACKUP_DIR")
        .assert()
        .success()
        .stdout(predicate::str::contains(env.backup_dir().display().to_string()));
    Ok(())
}

#[test]
fn test_json_registry_via_flag() -> Result<()> {
    let env = Env::new()?;
    let path = env.write(".npmrc", "save-exact=true")?;

    env.cmd()?
        .args(["-m", "map.json", "backup", path.to_str().unwrap()])
        .assert()
        .success();

    let data = fs::read_to_string(env.backup_dir().join("map.json"))?;
    let value: serde_json::Value = serde_json::from_str(&data)?;
    assert_eq!(value.as_object().map(serde_json::Map::len), Some(1));
    Ok(())
}

#[test]
fn test_completion_generates_script() -> Result<()> {
    let env = Env::new()?;
    env.cmd()?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cfgvault"));
    Ok(())
}
