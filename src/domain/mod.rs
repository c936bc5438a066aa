// Domain layer: data models and ports. Concrete adapters live under config/, crawling/ and nlp/.

pub mod model;
pub mod ports;
