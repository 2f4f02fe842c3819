//! Command-line front end over the client library.
//!
//! Each command maps onto one user action of the document desk. Everything
//! except `login` and `logout` requires a live session.

pub mod auth;
pub mod documents;
pub mod upload;

use crate::config::Settings;
use crate::AppState;
use std::path::PathBuf;

pub const USAGE: &str = "\
usage: pdf-desk <command>

commands:
  login <username> <password>        log in and remember the session
  logout                             forget the session
  status                             show whether the session is valid
  documents [page] [search]          list uploaded documents
  chunks <document-id> [page] [search]
                                     list a document's text chunks
  upload <path>                      upload one PDF file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Logout,
    Status,
    Documents { page: u32, search: Option<String> },
    Chunks { document_id: i64, page: u32, search: Option<String> },
    Upload { path: PathBuf },
}

impl Command {
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let name = args.next().ok_or_else(|| "missing command".to_string())?;
        let rest: Vec<String> = args.collect();

        match (name.as_str(), rest.as_slice()) {
            ("login", [username, password]) => Ok(Command::Login {
                username: username.clone(),
                password: password.clone(),
            }),
            ("logout", []) => Ok(Command::Logout),
            ("status", []) => Ok(Command::Status),
            ("documents", rest) if rest.len() <= 2 => {
                let (page, search) = page_and_search(rest)?;
                Ok(Command::Documents { page, search })
            }
            ("chunks", [id, rest @ ..]) if rest.len() <= 2 => {
                let document_id = id
                    .parse()
                    .map_err(|_| format!("invalid document id '{}'", id))?;
                let (page, search) = page_and_search(rest)?;
                Ok(Command::Chunks {
                    document_id,
                    page,
                    search,
                })
            }
            ("upload", [path]) => Ok(Command::Upload {
                path: PathBuf::from(path),
            }),
            (name, _) => Err(format!("unknown command or wrong arguments: '{}'", name)),
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Command::Login { .. } | Command::Logout)
    }
}

fn page_and_search(args: &[String]) -> Result<(u32, Option<String>), String> {
    let page = match args.first() {
        Some(page) => page
            .parse::<u32>()
            .ok()
            .filter(|page| *page >= 1)
            .ok_or_else(|| format!("invalid page '{}'", page))?,
        None => 1,
    };
    Ok((page, args.get(1).cloned()))
}

/// Run one command against a prepared application state.
pub async fn run(command: Command, state: &AppState, settings: &Settings) -> anyhow::Result<()> {
    let _monitor = if command.requires_session() {
        let monitor = state.auth.start();
        if !state.auth.ready().await.is_authenticated {
            anyhow::bail!("not logged in; run `pdf-desk login <username> <password>` first");
        }
        Some(monitor)
    } else {
        None
    };

    match command {
        Command::Login { username, password } => auth::login(state, &username, &password).await,
        Command::Logout => auth::logout(state).await,
        Command::Status => auth::status(state).await,
        Command::Documents { page, search } => {
            documents::list_documents(state, settings, page, search).await
        }
        Command::Chunks {
            document_id,
            page,
            search,
        } => documents::list_chunks(state, settings, document_id, page, search).await,
        Command::Upload { path } => upload::upload(state, settings, &path).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        Command::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_documents_with_defaults() {
        assert_eq!(
            parse(&["documents"]).unwrap(),
            Command::Documents {
                page: 1,
                search: None
            }
        );
        assert_eq!(
            parse(&["documents", "2", "invoice"]).unwrap(),
            Command::Documents {
                page: 2,
                search: Some("invoice".to_string())
            }
        );
    }

    #[test]
    fn parses_chunks() {
        assert_eq!(
            parse(&["chunks", "42", "3"]).unwrap(),
            Command::Chunks {
                document_id: 42,
                page: 3,
                search: None
            }
        );
        assert!(parse(&["chunks", "abc"]).is_err());
        assert!(parse(&["chunks"]).is_err());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["documents", "0"]).is_err());
        assert!(parse(&["login", "only-user"]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
    }

    #[test]
    fn login_and_logout_skip_the_session_guard() {
        assert!(!parse(&["login", "u", "p"]).unwrap().requires_session());
        assert!(!parse(&["logout"]).unwrap().requires_session());
        assert!(parse(&["upload", "a.pdf"]).unwrap().requires_session());
    }
}
