pub mod sessions;

pub(crate) use sessions::SessionStore;
