pub mod answer;
pub mod faq_store;
