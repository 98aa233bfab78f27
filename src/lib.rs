pub mod config;
pub mod food;
pub mod game;
pub mod game_loop;
pub mod input;
pub mod interpolate;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod snake;
pub mod terminal_canvas;
pub mod terminal_runtime;
pub mod ui;
