//! Structural validation of the VCF header.

/// Prefix of the mandatory first line.
pub const FILE_FORMAT_MARKER: &str = "##fileformat=VCF";

/// Prefix of the mandatory column header line.
pub const COLUMN_HEADER_MARKER: &str = "#CHROM";

/// Error type for `validate()`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Empty file")]
    Empty,
    #[error("Invalid VCF header. First line must start with '##fileformat=VCF', got: {0}")]
    MissingFileFormat(String),
    #[error("Missing #CHROM header line in VCF file")]
    MissingColumnHeader,
}

/// Check that `content` declares the VCF format and has a column header line.
///
/// Leading and trailing blank space of the whole input is ignored.
pub fn validate(content: &str) -> Result<(), Error> {
    let content = content.trim();
    let first_line = content.lines().next().ok_or(Error::Empty)?.trim();
    if !first_line.starts_with(FILE_FORMAT_MARKER) {
        return Err(Error::MissingFileFormat(
            first_line.chars().take(50).collect(),
        ));
    }

    if !content
        .lines()
        .any(|line| line.starts_with(COLUMN_HEADER_MARKER))
    {
        return Err(Error::MissingColumnHeader);
    }

    Ok(())
}
