//! Viral or Fail core: rubrics, agents and the round state machine.
//!
//! Nothing in this crate touches the terminal. Presentation and player input
//! reach the game loop through [`round::RoundObserver`].

pub mod agent;
pub mod llm_client;
pub mod persona;
pub mod platform;
pub mod round;
pub mod score;
pub mod trends;
