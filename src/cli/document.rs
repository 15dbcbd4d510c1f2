//! Document CLI commands
//!
//! Every command here logs in first; the session lives only for the duration
//! of the command.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Subcommand;

use super::prompt::{confirm, read_password};
use crate::config::settings::Settings;
use crate::crypto::CryptoProvider;
use crate::display::document::{format_document_details, format_document_list};
use crate::error::{VaultError, VaultResult};
use crate::models::{sort_documents, ListOrder, UploadRequest};
use crate::services::{AuthService, DocumentService, Session};
use crate::storage::Storage;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Document subcommands
#[derive(Subcommand)]
pub enum DocumentCommands {
    /// Encrypt and store one or more files
    Add {
        /// Files to add
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Subject (category) to file the documents under
        #[arg(short, long)]
        subject: String,
        /// Display name (defaults to the file name without its extension)
        #[arg(short, long)]
        name: Option<String>,
        /// MIME type (guessed from the extension if omitted)
        #[arg(short, long)]
        mime: Option<String>,
    },
    /// List stored documents
    #[command(alias = "ls")]
    List {
        /// Only show documents with exactly this subject
        #[arg(short, long)]
        subject: Option<String>,
        /// Sort order (date-desc, date-asc, name-asc, name-desc)
        #[arg(long)]
        sort: Option<String>,
    },
    /// Decrypt a document to a file
    Get {
        /// Document ID or unique ID prefix
        id: String,
        /// Output path ("-" for stdout; defaults to the document's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Permanently delete a document
    #[command(alias = "delete")]
    Rm {
        /// Document ID or unique ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Handle a document command
pub fn handle_document_command(
    storage: &Storage,
    settings: &Settings,
    crypto: &dyn CryptoProvider,
    cmd: DocumentCommands,
) -> VaultResult<()> {
    let session = unlock(storage, crypto)?;
    let service = DocumentService::new(storage, crypto);

    match cmd {
        DocumentCommands::Add {
            files,
            subject,
            name,
            mime,
        } => {
            let mut requests = Vec::with_capacity(files.len());
            for path in &files {
                requests.push(read_upload(path, name.as_deref(), &subject, mime.as_deref())?);
            }

            // Only an explicit shared name gets the "<name> - <file>" treatment
            let ids = if name.is_some() {
                service.upload_many(&session, requests)?
            } else {
                let mut ids = Vec::with_capacity(requests.len());
                for request in requests {
                    ids.push(service.upload(&session, request)?);
                }
                ids
            };

            for (path, id) in files.iter().zip(&ids) {
                println!("Added: {} ({})", path.display(), id.short());
            }
            println!("Stored {} document(s) under '{}'", ids.len(), subject);
        }

        DocumentCommands::List { subject, sort } => {
            let order = match sort {
                Some(s) => ListOrder::parse(&s).ok_or_else(|| {
                    VaultError::Validation(format!(
                        "Invalid sort order: '{}'. Valid orders: date-desc, date-asc, name-asc, name-desc",
                        s
                    ))
                })?,
                None => settings.default_sort,
            };

            let mut docs = service.list(&session, subject.as_deref())?;
            sort_documents(&mut docs, order);
            print!("{}", format_document_list(&docs));
        }

        DocumentCommands::Get { id, output } => {
            let id = service.resolve(&id)?;
            let doc = service.download(&session, &id)?;

            match output {
                Some(path) if path.as_os_str() == "-" => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&doc.payload)?;
                    stdout.flush()?;
                }
                Some(path) => {
                    fs::write(&path, &doc.payload).map_err(|e| {
                        VaultError::Io(format!("Failed to write {}: {}", path.display(), e))
                    })?;
                    print!("{}", format_document_details(&id, &doc));
                    println!("Saved to: {}", path.display());
                }
                None => {
                    let file_name = if doc.metadata.original_file_name.is_empty() {
                        doc.name.as_str()
                    } else {
                        doc.metadata.original_file_name.as_str()
                    };
                    let path = safe_output_path(file_name)?;
                    if path.exists() {
                        return Err(VaultError::Validation(format!(
                            "{} already exists; pass --output to choose another path",
                            path.display()
                        )));
                    }
                    fs::write(&path, &doc.payload).map_err(|e| {
                        VaultError::Io(format!("Failed to write {}: {}", path.display(), e))
                    })?;
                    print!("{}", format_document_details(&id, &doc));
                    println!("Saved to: {}", path.display());
                }
            }
        }

        DocumentCommands::Rm { id, yes } => {
            let id = service.resolve(&id)?;

            if !yes && !confirm(&format!("Permanently delete document {}?", id.short()))? {
                println!("Aborted.");
                return Ok(());
            }

            service.delete(&session, &id)?;
            println!("Deleted: {}", id.short());
        }
    }

    Ok(())
}

/// Log in with the master password and return a ready session
fn unlock(storage: &Storage, crypto: &dyn CryptoProvider) -> VaultResult<Session> {
    let auth = AuthService::new(storage, crypto);
    if !auth.has_account()? {
        return Err(VaultError::ConfigMissing);
    }

    let password = read_password("Master password: ")?;
    let mut session = Session::new();
    auth.login(&password, &mut session)?;
    Ok(session)
}

fn read_upload(
    path: &Path,
    name: Option<&str>,
    subject: &str,
    mime: Option<&str>,
) -> VaultResult<UploadRequest> {
    let bytes = fs::read(path)
        .map_err(|e| VaultError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mime_type = mime
        .map(str::to_string)
        .or_else(|| guess_mime_type(&file_name))
        .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

    let display_name = match name {
        Some(name) => name.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    Ok(UploadRequest::new(bytes, display_name, subject).with_file_info(file_name, mime_type))
}

/// Output path in the current directory for a decrypted name.
///
/// Only the final path component is used, so a stored name cannot point
/// outside the working directory.
fn safe_output_path(name: &str) -> VaultResult<PathBuf> {
    Path::new(name)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| {
            VaultError::Validation(format!(
                "Cannot derive a file name from '{}'; pass --output",
                name
            ))
        })
}

/// Guess a MIME type from the file extension
fn guess_mime_type(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let mime = match ext.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        _ => return None,
    };
    Some(mime.to_string())
}
