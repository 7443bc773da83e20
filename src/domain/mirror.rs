use crate::domain::{
    DownloadPath,
    url::{UrlBuilder, encode_segment},
};
use axum::http::Uri;
use std::fmt;
use thiserror::Error;

const SCHEMES: [&str; 3] = ["http", "https", "ftp"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Repo,
    Arch,
    Filename,
}

const VARIABLES: [(&str, Piece); 3] = [
    ("$filename", Piece::Filename),
    ("$repo", Piece::Repo),
    ("$arch", Piece::Arch),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MirrorError {
    #[error("invalid mirror URL `{0}`")]
    InvalidUrl(String),
    #[error("unsupported mirror scheme `{0}`")]
    UnsupportedScheme(String),
    #[error("mirror URL has no host")]
    MissingHost,
}

/// Fallback mirror URL, e.g. `https://mirror.example/$repo/os/$arch`.
///
/// `$repo`, `$arch` and `$filename` may appear anywhere inside a path
/// segment. Without `$filename` the filename becomes the last segment.
#[derive(Debug, Clone)]
pub struct MirrorTemplate {
    source: String,
    scheme: String,
    authority: String,
    segments: Vec<Vec<Piece>>,
    has_filename: bool,
}

impl MirrorTemplate {
    pub fn parse(template: &str) -> Result<Self, MirrorError> {
        let source = template.trim().to_string();
        let uri: Uri = source
            .parse()
            .map_err(|_| MirrorError::InvalidUrl(source.clone()))?;

        let scheme = uri
            .scheme_str()
            .ok_or_else(|| MirrorError::InvalidUrl(source.clone()))?
            .to_ascii_lowercase();

        if !SCHEMES.contains(&scheme.as_str()) {
            return Err(MirrorError::UnsupportedScheme(scheme));
        }

        let authority = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(MirrorError::MissingHost)?;

        let segments: Vec<Vec<Piece>> = uri
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(parse_segment)
            .collect();

        let has_filename = segments.iter().flatten().any(|p| *p == Piece::Filename);

        Ok(Self {
            source,
            scheme,
            authority,
            segments,
            has_filename,
        })
    }

    pub fn render(&self, path: &DownloadPath) -> String {
        let mut url = UrlBuilder::new(&self.scheme, &self.authority);

        for segment in &self.segments {
            let rendered: String = segment
                .iter()
                .map(|piece| match piece {
                    Piece::Literal(text) => text.clone(),
                    Piece::Repo => encode_segment(&path.repo),
                    Piece::Arch => encode_segment(&path.arch),
                    Piece::Filename => encode_segment(&path.filename),
                })
                .collect();

            url = url.raw_segment(&rendered);
        }

        if !self.has_filename {
            url = url.segment(&path.filename);
        }

        url.build()
    }
}

impl fmt::Display for MirrorTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segment(segment: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut rest = segment;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match VARIABLES.iter().find(|(name, _)| rest.starts_with(name)) {
            Some((name, piece)) => {
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(piece.clone());
                rest = &rest[name.len()..];
            }
            None => {
                literal.push('$');
                rest = &rest[1..];
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    pieces
}
