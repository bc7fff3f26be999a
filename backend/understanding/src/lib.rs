//! Text recognition backends.
//!
//! [`GeminiRecognizer`] sends one image to Gemini `generateContent` and reads
//! the text back. [`MockRecognizer`] answers with canned results for tests and
//! offline demos.

pub mod gemini;
pub mod mock;

pub use gemini::{build_request, extract_text, GeminiRecognizer, GenerateContentRequest, OCR_PROMPT};
pub use mock::MockRecognizer;
