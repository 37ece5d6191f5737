pub mod axis;
pub mod hit_test;
pub mod surfaces;
pub mod sync;
