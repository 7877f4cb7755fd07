//! Backup subcommands

use anyhow::Result;

use crate::AchandoOferta;

pub async fn create(app: &AchandoOferta) -> Result<()> {
    let file = app.backup_service().create().await?;
    println!("Created backup: {}", file);
    Ok(())
}

pub async fn list(app: &AchandoOferta) -> Result<()> {
    let files = app.backup_service().list().await?;
    println!("Backups ({}):", files.len());
    for file in files {
        match file.created_at {
            Some(created_at) => println!("  {} ({})", file.name, created_at),
            None => println!("  {}", file.name),
        }
    }
    Ok(())
}

pub async fn restore(app: &AchandoOferta, file: &str) -> Result<()> {
    let timestamp = app.backup_service().restore(file).await?;
    println!("Restored {} (taken at {})", file, timestamp);
    Ok(())
}
