//! # doc-suggest
//!
//! The AI-assisted recipient-suggestion core of a document distribution
//! backend. Given a stored document and an ordered list of candidate
//! recipient units, it extracts text from the uploaded file, splits long
//! content into bounded chunks, queries a completion model per chunk, and
//! incrementally accumulates a deduplicated, size-capped suggestion set,
//! falling back to deterministic keyword matching whenever extraction or
//! the model is unavailable.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────┐   ┌───────────┐   ┌─────────┐   ┌─────────────┐
//! │ Extractors │──▶│ Validator │──▶│ Chunker │──▶│   Engine    │──▶ results
//! │ pdf/doc(x) │   │ (PDF gate)│   │ 10k char│   │ model calls │   (stream)
//! │ xls(x)     │   └───────────┘   └─────────┘   └──────┬──────┘
//! └───────────┘                                         │ on failure
//!                                                ┌──────▼──────┐
//!                                                │  Keyword    │
//!                                                │  fallback   │
//!                                                └─────────────┘
//! ```
//!
//! Extraction failures never propagate: a scanned PDF, a corrupt binary, or
//! an unsupported extension all resolve to "no content" and the request
//! still terminates in a well-formed result. HTTP transport, persistence,
//! auth, and email delivery are collaborator concerns, out of scope here.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration (model, extraction limits, chunking, fallback keywords) |
//! | [`models`] | Core data types and the streaming result record |
//! | [`extract`] | Per-format text extractors (PDF, DOC, DOCX, XLS, XLSX) |
//! | [`validate`] | Garbage filter gating the PDF strategies |
//! | [`chunk`] | Fixed-size sequential chunker |
//! | [`completion`] | Completion-model client trait + OpenAI implementation |
//! | [`prompt`] | Prompt construction and reply parsing |
//! | [`suggest`] | The suggestion engine (streaming + collapsed modes) |
//! | [`fallback`] | Deterministic keyword matcher |

pub mod chunk;
pub mod completion;
pub mod config;
pub mod extract;
pub mod fallback;
pub mod models;
pub mod prompt;
pub mod suggest;
pub mod validate;
