pub mod ports;
pub mod repositories;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;
