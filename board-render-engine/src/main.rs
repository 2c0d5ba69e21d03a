mod board;
mod engine;
mod feedback;
mod store;
mod ui;

use engine::core::app_setup::create_app;

fn main() {
    create_app().run();
}
