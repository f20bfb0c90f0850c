pub mod potability;
