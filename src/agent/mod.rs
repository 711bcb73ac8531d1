pub mod provider;
#[cfg(test)]
pub(crate) mod scripted;
