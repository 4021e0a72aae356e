pub mod angular_projector;
pub mod cross_attention_scorer;
pub mod cross_attention_service;
pub mod lexical_similarity_scorer;
pub mod spatial_projector;
pub mod stop_words;
