use anyhow::Result;

pub mod names;
pub mod mappings;
pub mod unique;
pub mod hierarchy;

pub trait NodeInfo<I> {
	fn get_node_info(&self) -> &I;
	fn get_node_info_mut(&mut self) -> &mut I;
	fn new(info: I) -> Self;
}

pub trait ToKey<K> {
	fn get_key(&self) -> Result<K>;
}

pub trait FromKey<K> {
	fn from_key(key: K, width: usize) -> Self;
}
