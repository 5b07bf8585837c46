//! Conversation flow: commands, buttons, length selection and text intake

pub mod controller;
pub mod messages;

pub use controller::{DialogueController, Dispatch, re_prompt};
