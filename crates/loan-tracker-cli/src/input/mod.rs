pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// JSON payload from `--input <file>` if given, otherwise from piped stdin.
/// `None` means neither was supplied and the caller should fall back to flags.
pub fn read_payload<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_json(path)?));
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
