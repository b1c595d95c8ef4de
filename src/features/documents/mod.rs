//! Document storage endpoints.
//!
//! Thin HTTP surface over the storage gateway. Storage paths are generated
//! server-side from the owning organization, entity and document type.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/api/documents/upload` | Upload a document (multipart) |
//! | GET | `/api/documents/download` | Stream a document |
//! | DELETE | `/api/documents` | Delete a document |
//! | GET | `/api/documents/signed-url` | Time-limited access URL |
//! | GET | `/api/documents` | List documents under a prefix |
//! | POST | `/api/documents/move` | Relocate a document |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::DocumentStorageService;
