use std::io::{stdout, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use console::{style, truncate_str};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, QueueableCommand};
use playlist_core::{ListController, ListObserver};
use tokio::runtime::Runtime;

use crate::prompts::prompt_input;

const TICK: Duration = Duration::from_millis(100);
const MIN_ROWS: usize = 5;

/// Observer that flags a first-page merge so the browser scrolls the window
/// back to the top.
#[derive(Default)]
pub struct ScrollHome {
    flag: AtomicBool,
}

impl ScrollHome {
    fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

impl ListObserver for ScrollHome {
    fn scroll_reset(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Raw-mode list browser over the controller's derived view.
///
/// Keys: up/down move the selection (and drive scroll-triggered
/// pagination), `f` toggles the favourite on the selected entry, `/` enters
/// title-filter mode, `o` switches to favourites only, `p` changes the page
/// size, `q` or Esc quits.
pub struct Browser<'a> {
    controller: &'a mut ListController,
    runtime: &'a Runtime,
    scroll_home: Arc<ScrollHome>,
    offset: usize,
    selected: usize,
    filter_entry: Option<String>,
}

impl<'a> Browser<'a> {
    pub fn new(
        controller: &'a mut ListController,
        runtime: &'a Runtime,
        scroll_home: Arc<ScrollHome>,
    ) -> Self {
        Self {
            controller,
            runtime,
            scroll_home,
            offset: 0,
            selected: 0,
            filter_entry: None,
        }
    }

    pub fn run(mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, Hide)?;
        let result = self.event_loop(&mut stdout);
        execute!(stdout, Show)?;
        terminal::disable_raw_mode()?;
        result
    }

    fn event_loop(&mut self, stdout: &mut Stdout) -> Result<()> {
        loop {
            if self.scroll_home.take() {
                self.offset = 0;
                self.selected = 0;
            }
            self.clamp_to_view();
            self.redraw(stdout)?;

            if poll(TICK)? {
                if let Event::Key(key) = read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    let proceed = if self.filter_entry.is_some() {
                        self.handle_filter_key(key);
                        true
                    } else {
                        self.handle_key(key)?
                    };
                    if !proceed {
                        return Ok(());
                    }
                }
            }

            // Apply a pending title filter once its debounce window elapsed.
            self.controller.poll_filter(Instant::now());
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Up | KeyCode::Char('w') => self.move_selection_up(),
            KeyCode::Down | KeyCode::Char('s') => self.move_selection_down(),
            KeyCode::Char('f') => self.toggle_selected_favourite()?,
            KeyCode::Char('/') => {
                self.filter_entry = Some(
                    self.controller
                        .query()
                        .filter_title
                        .clone()
                        .unwrap_or_default(),
                );
            }
            KeyCode::Char('o') => {
                let only = !self.controller.query().only_favourites;
                self.controller.set_only_favourites(only);
                self.offset = 0;
                self.selected = 0;
            }
            KeyCode::Char('p') => self.change_page_size()?,
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
            _ => {}
        }
        Ok(true)
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        let Some(text) = self.filter_entry.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                self.filter_entry = None;
            }
            KeyCode::Esc => {
                self.filter_entry = None;
                self.controller.set_filter_title(None, Instant::now());
            }
            KeyCode::Backspace => {
                text.pop();
                let submitted = text.clone();
                self.controller
                    .set_filter_title(Some(submitted), Instant::now());
            }
            KeyCode::Char(c) => {
                text.push(c);
                let submitted = text.clone();
                self.controller
                    .set_filter_title(Some(submitted), Instant::now());
            }
            _ => {}
        }
    }

    fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        }
    }

    fn move_selection_down(&mut self) {
        let view_len = self.controller.view().len();
        if view_len == 0 {
            return;
        }
        if self.selected + 1 < view_len {
            self.selected += 1;
        }
        let rows = self.viewport_rows();
        if self.selected >= self.offset + rows {
            self.offset = self.selected + 1 - rows;
        }
        // The window moved; let the controller decide whether the next page
        // is needed.
        let last_visible = self.offset + rows - 1;
        self.runtime
            .block_on(self.controller.on_scroll(last_visible, rows));
    }

    fn toggle_selected_favourite(&mut self) -> Result<()> {
        let view = self.controller.view();
        if let Some(item) = view.get(self.selected) {
            let id = item.id.clone();
            self.controller.toggle_favourite(&id)?;
        }
        Ok(())
    }

    fn change_page_size(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        println!();
        let current = self.controller.query().page_size.to_string();
        let input = prompt_input("Page size", Some(&current))?;
        if let Ok(size) = input.trim().parse::<u32>() {
            if size > 0 {
                self.runtime.block_on(self.controller.set_page_size(size));
            }
        }
        terminal::enable_raw_mode()?;
        Ok(())
    }

    fn clamp_to_view(&mut self) {
        let view_len = self.controller.view().len();
        if view_len == 0 {
            self.offset = 0;
            self.selected = 0;
            return;
        }
        if self.selected >= view_len {
            self.selected = view_len - 1;
        }
        if self.offset > self.selected {
            self.offset = self.selected;
        }
    }

    fn viewport_rows(&self) -> usize {
        let (_, height) = terminal::size().unwrap_or((80, 24));
        (height as usize).saturating_sub(6).max(MIN_ROWS)
    }

    fn redraw(&mut self, stdout: &mut Stdout) -> Result<()> {
        let view = self.controller.view();
        let rows = self.viewport_rows();
        let query = self.controller.query();

        stdout.queue(MoveTo(0, 0))?;
        stdout.queue(terminal::Clear(ClearType::All))?;

        let mode = if query.only_favourites {
            style("favourites only").magenta().to_string()
        } else if let Some(filter) = &query.filter_title {
            format!("filter: {}", style(filter).cyan())
        } else {
            "all items".to_string()
        };
        write!(
            stdout,
            "{}  {} of {} loaded  [{}]\r\n\r\n",
            style("Playlist").bold(),
            self.controller.accumulated().len(),
            self.controller.total_results(),
            mode
        )?;

        if view.is_empty() {
            write!(stdout, "  {}\r\n", style("(nothing to show)").dim())?;
        }
        for (index, item) in view.iter().enumerate().skip(self.offset).take(rows) {
            let marker = if index == self.selected { ">" } else { " " };
            let star = if item.is_favourite {
                style("*").yellow().to_string()
            } else {
                " ".to_string()
            };
            write!(
                stdout,
                "{} {} {}  {}\r\n",
                marker,
                star,
                truncate_str(&item.title, 60, "..."),
                style(truncate_str(&item.channel_title, 24, "...")).dim()
            )?;
        }

        write!(stdout, "\r\n")?;
        match &self.filter_entry {
            Some(text) => write!(
                stdout,
                "{} {}_\r\n",
                style("filter:").cyan(),
                text
            )?,
            None => write!(
                stdout,
                "{}\r\n",
                style("up/down scroll  f favourite  / filter  o favourites  p page size  q quit")
                    .dim()
            )?,
        }
        stdout.flush()?;
        Ok(())
    }
}
