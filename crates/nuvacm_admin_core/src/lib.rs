//! Admin console logic for the nuvacm CMS: form state, status reporting and the calls the
//! event and blog screens make against the API. Rendering is left to whichever UI embeds it.

pub mod api;
pub mod blogs;
pub mod events;
pub mod session;
pub mod state;
pub mod status;

pub use api::{ClientError, ClientResult, CmsApi, HttpCmsApi};
pub use blogs::{BlogForm, BlogFormController};
pub use events::{EventForm, EventFormController};
pub use session::AdminSession;
pub use state::{FormMode, FormState};
pub use status::{Status, StatusKind};
