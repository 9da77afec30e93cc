//! REST adapters for the three external collaborators: the Firestore
//! document store, Identity Toolkit anonymous sign-in, and the Algolia
//! search index. Each implements the matching `paperdeck-core` provider
//! trait; nothing else in the workspace talks to the network.

mod algolia;
mod firestore;
mod identity;

pub use algolia::AlgoliaClient;
pub use firestore::FirestoreClient;
pub use firestore::NewWhitepaper;
pub use identity::IdentityClient;
