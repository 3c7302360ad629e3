use crate::errors::ExtractionError;
use crate::types::{ContentResponsePart, GenerateContentResponse};

/// Walks a response down to the generated code.
///
/// Each step either hands the next level to the following step or stops
/// with the error for the level that was missing.
pub fn extract_code(response: &GenerateContentResponse) -> Result<String, ExtractionError> {
    let content = first_content(response)?;
    let text = first_text(content)?;
    let code = non_blank(text)?;
    Ok(code.to_string())
}

fn first_content(response: &GenerateContentResponse) -> Result<&ContentResponsePart, ExtractionError> {
    response
        .candidates
        .as_deref()
        .and_then(|items| items.first())
        .and_then(Option::as_ref)
        .and_then(|candidate| candidate.content.as_ref())
        .ok_or(ExtractionError::NoContent)
}

fn first_text(content: &ContentResponsePart) -> Result<&str, ExtractionError> {
    content
        .parts
        .as_deref()
        .and_then(|items| items.first())
        .and_then(Option::as_ref)
        .and_then(|part| part.text.as_deref())
        .filter(|text| !text.is_empty())
        .ok_or(ExtractionError::NoCode)
}

fn non_blank(text: &str) -> Result<&str, ExtractionError> {
    if text.trim().is_empty() {
        Err(ExtractionError::EmptyCode)
    } else {
        Ok(text)
    }
}
