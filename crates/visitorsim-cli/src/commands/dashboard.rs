use super::Connection;

pub fn run(conn: &Connection) {
    let api = conn.client();
    let rt = super::runtime();
    let mut app = crate::tui::app::App::new(api, rt);
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
