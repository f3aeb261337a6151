use blake3::Hasher;

use crate::mapping::MappingSet;

pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(content);
    hasher.finalize().to_hex().to_string()
}

/// Pretty JSON exactly as it is written to disk.
pub fn render(mapping: &MappingSet) -> serde_json::Result<String> {
    serde_json::to_string_pretty(mapping).map(|mut s| {
        s.push('\n');
        s
    })
}

/// Digest of the rendered mapping, comparable with `hash_content` of a file.
pub fn fingerprint(mapping: &MappingSet) -> serde_json::Result<String> {
    render(mapping).map(|s| hash_content(s.as_bytes()))
}
