use crate::{
    CliError,
    command::{Command, HELP},
};
use rowscan::{
    StatusTracker, Viewport,
    core::{obs::metrics_report, seed::SeedHandle},
    prelude::*,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use std::fmt::Write as _;
use tokio::runtime::Runtime;

///
/// Shell
///
/// Line-oriented table view: each command updates the session, waits for
/// any resulting fetch, then prints the rows in view.
///

pub struct Shell {
    runtime: Runtime,
    driver: SessionDriver,
    status: StatusTracker,
    seeding: Option<SeedHandle>,
    viewport: Viewport,
    container_height: u64,
    scroll_top: u64,
}

impl Shell {
    pub fn new(
        runtime: Runtime,
        driver: SessionDriver,
        status: StatusTracker,
        seeding: Option<SeedHandle>,
        viewport: Viewport,
        container_height: u64,
    ) -> Self {
        Self {
            runtime,
            driver,
            status,
            seeding,
            viewport,
            container_height,
            scroll_top: 0,
        }
    }

    pub fn run(mut self) -> Result<(), CliError> {
        let handle = self.runtime.handle().clone();
        let _guard = handle.enter();

        self.driver.start();
        self.settle();
        println!("{}", self.render_rows());
        println!("{}", self.status_line());

        let mut editor = DefaultEditor::new()?;
        loop {
            match editor.readline("rowscan> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    match Command::parse(&line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.execute(command)?,
                        Err(err) => eprintln!("error: {err}"),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("use 'quit' to exit");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    // Fetches are spawned onto the runtime, so callers must have entered it.
    fn execute(&mut self, command: Command) -> Result<(), CliError> {
        match command {
            Command::Search(text) => {
                self.driver.set_search_input(&text);
                self.scroll_top = 0;
            }
            Command::Sort(key) => {
                self.driver.click_sort(key);
                self.scroll_top = 0;
            }
            Command::Unsort => {
                self.driver.reset_sort();
                self.scroll_top = 0;
            }
            Command::Filter(filter) => {
                self.driver.set_filter(filter);
                self.scroll_top = 0;
            }
            Command::Scroll(px) => {
                self.scroll_top = px;
                if self.near_bottom() {
                    self.driver.scroll_near_bottom();
                }
            }
            Command::More => {
                if !self.driver.scroll_near_bottom() {
                    println!("nothing more to load");
                }
            }
            Command::Show => {}
            Command::Status => {
                println!("{}", self.status_line());
                return Ok(());
            }
            Command::Json => {
                self.settle();
                let rows: Vec<&Record> = self.rows_in_view();
                println!("{}", serde_json::to_string_pretty(&rows)?);
                return Ok(());
            }
            Command::Metrics => {
                println!("{}", serde_json::to_string_pretty(&metrics_report())?);
                return Ok(());
            }
            Command::Help => {
                println!("{HELP}");
                return Ok(());
            }
            Command::Quit => return Ok(()),
        }

        self.settle();
        println!("{}", self.render_rows());
        println!("{}", self.status_line());

        Ok(())
    }

    fn settle(&mut self) {
        self.runtime.block_on(self.driver.settle());
        self.poll_seeding();

        if let Some(err) = self.driver.session().failure() {
            eprintln!("query failed: {}", err.display_with_class());
        }
    }

    fn poll_seeding(&mut self) {
        let Some(seeding) = self.seeding.as_mut() else {
            return;
        };
        while let Some(progress) = seeding.try_next() {
            self.status.observe(&progress);
        }
        if !self.status.is_loading() {
            self.seeding = None;
        }
    }

    fn near_bottom(&self) -> bool {
        let session = self.driver.session();
        let scroll_height = self
            .viewport
            .total_height(session.visible_records().len(), session.is_loading());

        self.viewport
            .near_bottom(scroll_height, self.scroll_top, self.container_height)
    }

    fn rows_in_view(&self) -> Vec<&Record> {
        let visible = self.driver.session().visible_records();
        let window = self
            .viewport
            .window(self.scroll_top, self.container_height, visible.len());

        visible[window].to_vec()
    }

    fn render_rows(&self) -> String {
        let session = self.driver.session();
        let visible = session.visible_records();
        let window = self
            .viewport
            .window(self.scroll_top, self.container_height, visible.len());

        let mut out = format!(
            "{:>7}  {:<16} {:<32} {:<14} {:>5}  {:<10}  {}\n",
            "#", "name", "email", "phone", "score", "activity", "added by"
        );
        for (index, record) in visible.iter().enumerate().take(window.end).skip(window.start) {
            let date = record
                .last_activity_at
                .date_string()
                .unwrap_or_else(|_| "-".to_string());
            let _ = writeln!(
                out,
                "{:>7}  {:<16} {:<32} {:<14} {:>5}  {:<10}  {}",
                index + 1,
                record.name,
                record.email,
                record.phone,
                record.score,
                date,
                record.added_by
            );
        }
        let _ = write!(
            out,
            "[{} | sort {} | rows {}-{} of {} visible, {} buffered{}]",
            session.phase(),
            session.sort(),
            window.start + usize::from(!window.is_empty()),
            window.end,
            visible.len(),
            session.buffer().len(),
            if session.has_more() { ", more available" } else { "" }
        );

        out
    }

    fn status_line(&self) -> String {
        self.status.render(self.driver.session().buffer().len())
    }
}
