pub mod preference_impl;
pub mod preference_logic;
