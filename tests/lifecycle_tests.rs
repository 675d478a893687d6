#![cfg(unix)]

mod common;

use anyhow::Result;
use cfgvault::tracking::ConfigFileEntry;
use common::TestVault;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

#[test]
fn test_backup_replaces_file_with_symlink() -> Result<()> {
    let vault = TestVault::new()?;
    let bashrc = vault.write_home_file(".bashrc", "export EDITOR=vim\n")?;
    let entry = ConfigFileEntry::create(&bashrc, &vault.ctx.layout)?;

    vault.ctx.store().backup_files(&[entry.clone()])?;

    let blob = vault.backup_dir().join(entry.hash_short());
    assert!(fs::symlink_metadata(&bashrc)?.file_type().is_symlink());
    assert_eq!(fs::read_link(&bashrc)?, blob);
    assert_eq!(fs::read_to_string(&bashrc)?, "export EDITOR=vim\n");
    assert!(blob.is_file());

    let map = vault.ctx.registry().parse()?;
    assert_eq!(map.len(), 1);
    assert_eq!(map[&entry.hash_short()].path(), Path::new(".bashrc"));
    Ok(())
}

#[test]
fn test_delete_with_restore_brings_back_plain_file() -> Result<()> {
    let vault = TestVault::new()?;
    let bashrc = vault.write_home_file(".bashrc", "alias ll='ls -l'\n")?;
    fs::set_permissions(&bashrc, fs::Permissions::from_mode(0o644))?;
    let entry = ConfigFileEntry::create(&bashrc, &vault.ctx.layout)?;
    vault.ctx.store().backup_files(&[entry.clone()])?;

    vault.ctx.store().delete_files(true, &[entry.clone()])?;

    let metadata = fs::symlink_metadata(&bashrc)?;
    assert!(metadata.file_type().is_file());
    assert_eq!(metadata.permissions().mode() & 0o777, 0o644);
    assert_eq!(fs::read_to_string(&bashrc)?, "alias ll='ls -l'\n");
    assert!(!entry.backup_path(&vault.ctx.layout).exists());
    assert!(vault.ctx.registry().parse()?.is_empty());
    Ok(())
}

#[test]
fn test_delete_without_restore_removes_dangling_link() -> Result<()> {
    let vault = TestVault::new()?;
    let path = vault.write_home_file(".config/nvim/init.lua", "vim.o.number = true")?;
    let entry = ConfigFileEntry::create(&path, &vault.ctx.layout)?;
    vault.ctx.store().backup_files(&[entry.clone()])?;

    vault.ctx.store().delete_files(false, &[entry])?;

    assert!(fs::symlink_metadata(&path).is_err());
    assert!(vault.ctx.registry().parse()?.is_empty());
    Ok(())
}

#[test]
fn test_private_permissions_survive_round_trip() -> Result<()> {
    let vault = TestVault::new()?;
    let path = vault.write_home_file(".netrc", "machine example.com")?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    let entry = ConfigFileEntry::create(&path, &vault.ctx.layout)?;
    assert_eq!(entry.perm(), 0o600);

    vault.ctx.store().backup_files(&[entry.clone()])?;
    vault.ctx.store().delete_files(true, &[entry])?;

    let mode = fs::metadata(&path)?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    Ok(())
}

#[test]
fn test_restore_after_link_was_removed() -> Result<()> {
    let vault = TestVault::new()?;
    let path = vault.write_home_file(".gitconfig", "[user]\n")?;
    let entry = ConfigFileEntry::create(&path, &vault.ctx.layout)?;
    vault.ctx.store().backup_files(&[entry.clone()])?;

    fs::remove_file(&path)?;
    let entries = vault.ctx.registry().entries()?;
    vault.ctx.store().restore_files(&entries)?;

    assert!(fs::symlink_metadata(&path)?.file_type().is_symlink());
    assert_eq!(fs::read_to_string(&path)?, "[user]\n");
    Ok(())
}

#[test]
fn test_browsable_entry_moves_into_internals() -> Result<()> {
    let vault = TestVault::new()?;
    let path = vault.write_home_file(".config/git/config", "[core]\n")?;
    let entry = ConfigFileEntry::create(&path, &vault.ctx.layout)?;
    vault.ctx.store().backup_files(&[entry.clone()])?;
    let old_blob = entry.backup_path(&vault.ctx.layout);

    let mut entries = vault.ctx.registry().entries()?;
    vault
        .ctx
        .store()
        .make_files_browsable(Path::new("home"), &mut entries)?;

    let hidden = vault
        .backup_dir()
        .join(".internals")
        .join(entry.hash_short());
    let replica = vault.backup_dir().join("home/.config/git/config");
    assert!(!old_blob.exists());
    assert!(hidden.is_file());
    assert_eq!(fs::read_link(&path)?, hidden);
    assert_eq!(fs::read_to_string(&replica)?, "[core]\n");

    // Replica and blob are the same inode
    fs::write(&path, "[core]\n\teditor = vim\n")?;
    assert_eq!(fs::read_to_string(&replica)?, "[core]\n\teditor = vim\n");
    Ok(())
}

#[test]
fn test_replicating_twice_keeps_one_replica() -> Result<()> {
    let vault = TestVault::new()?;
    let path = vault.write_home_file(".tmux.conf", "set -g mouse on")?;
    vault
        .ctx
        .store()
        .backup_files(&[ConfigFileEntry::create(&path, &vault.ctx.layout)?])?;

    for _ in 0..2 {
        let mut entries = vault.ctx.registry().entries()?;
        vault
            .ctx
            .store()
            .make_files_browsable(Path::new("home"), &mut entries)?;
    }

    assert_eq!(
        fs::read_to_string(vault.backup_dir().join("home/.tmux.conf"))?,
        "set -g mouse on"
    );
    let entries = vault.ctx.registry().entries()?;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_browsable());
    Ok(())
}

#[test]
fn test_backup_of_missing_file_fails() -> Result<()> {
    let vault = TestVault::new()?;
    let entry = ConfigFileEntry::from_parts(".missing", 0o644, false)?;

    assert!(vault.ctx.store().backup_files(&[entry]).is_err());
    assert!(vault.ctx.registry().parse()?.is_empty());
    Ok(())
}

#[test]
fn test_path_outside_home_is_rejected() -> Result<()> {
    let vault = TestVault::new()?;
    let outside = vault.temp_dir.path().join("elsewhere.conf");
    fs::write(&outside, "x")?;

    assert!(ConfigFileEntry::create(&outside, &vault.ctx.layout).is_err());
    assert!(ConfigFileEntry::create(vault.home(), &vault.ctx.layout).is_err());
    Ok(())
}
