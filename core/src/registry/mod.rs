pub mod bootup;
