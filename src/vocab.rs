use std::collections::HashMap;
use std::path::Path;

use crate::error::GopError;

/// Bijection between phoneme strings and dense token ids, with one id
/// designated as the CTC blank. Built once at startup, immutable after.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    token_to_id: HashMap<String, usize>,
    id_to_token: HashMap<usize, String>,
    blank_id: usize,
}

impl Vocabulary {
    /// Loads a vocabulary from a JSON object mapping phoneme strings to
    /// non-negative integer ids. Ids need not be contiguous.
    pub fn load(path: &Path, blank_id: usize) -> Result<Self, GopError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| GopError::io("read vocab.json", e))?;
        Self::from_json_str(&data, blank_id)
    }

    pub fn from_json_str(data: &str, blank_id: usize) -> Result<Self, GopError> {
        let token_to_id: HashMap<String, usize> =
            serde_json::from_str(data).map_err(|e| GopError::json("parse vocab.json", e))?;
        Ok(Self::from_map(token_to_id, blank_id))
    }

    pub fn from_map(token_to_id: HashMap<String, usize>, blank_id: usize) -> Self {
        let id_to_token = token_to_id
            .iter()
            .map(|(token, &id)| (id, token.clone()))
            .collect();
        Self {
            token_to_id,
            id_to_token,
            blank_id,
        }
    }

    pub fn token_id(&self, token: &str) -> Option<usize> {
        self.token_to_id.get(token).copied()
    }

    pub fn token_str(&self, id: usize) -> Option<&str> {
        self.id_to_token.get(&id).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    pub fn blank_id(&self) -> usize {
        self.blank_id
    }

    pub fn len(&self) -> usize {
        self.token_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_to_id.is_empty()
    }
}
