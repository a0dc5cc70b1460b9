use javelin_core::{FileId, Name, TokenIndex};

/// Read-only lookup from token index to name and line.
///
/// The lexer owns the real stream; this is the slice of its contract the
/// semantic core needs for identifiers and diagnostics.
pub struct LexStream {
    file: FileId,
    file_name: String,
    names: Vec<Name>,
    lines: Vec<u32>,
}

impl LexStream {
    pub fn new(file: FileId, file_name: impl Into<String>) -> Self {
        Self { file, file_name: file_name.into(), names: Vec::new(), lines: Vec::new() }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Append a token; used by the parser driver and by tests that build
    /// streams by hand.
    pub fn push_token(&mut self, name: impl Into<Name>, line: u32) -> TokenIndex {
        let index = TokenIndex::from_raw(self.names.len() as u32);
        self.names.push(name.into());
        self.lines.push(line);
        index
    }

    pub fn name(&self, token: TokenIndex) -> &str {
        self.names
            .get(token.index())
            .map(Name::as_str)
            .unwrap_or("")
    }

    pub fn line(&self, token: TokenIndex) -> u32 {
        self.lines.get(token.index()).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
