pub mod operations;
pub mod validate;

#[cfg(test)]
mod test;
