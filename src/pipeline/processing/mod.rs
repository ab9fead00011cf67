// Pipeline processing: per-source cleaning of extracted tables

pub mod normalize;
