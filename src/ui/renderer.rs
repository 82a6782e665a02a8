/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. `Scene` mirrors the grid, updated only from `CellMutation` events
///   2. Build the next frame from the scene into `front` buffer
///   3. Compare each cell with `back` buffer (previous frame)
///   4. Only emit terminal commands for cells that changed
///   5. All commands are batched with `queue!`, flushed once at the end
///   6. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use stardust::{CellMutation, CellType, Grid, PlayerState, Position, Teleport, TickReport};

// ══════════════════════════════════════════════════════════════
// Scene: the host's mirror of the session
// ══════════════════════════════════════════════════════════════

/// How long a status message stays up, in ticks.
const MESSAGE_TICKS: u32 = 30;

pub struct Scene {
    cells: Vec<Vec<CellType>>,
    player: Position,
    facing_left: bool,
    title: String,
    message: String,
    message_ticks: u32,
    pad_connected: bool,
}

impl Scene {
    pub fn new(grid: &Grid, player: &PlayerState, title: impl Into<String>) -> Self {
        let mut cells = vec![vec![CellType::Empty; grid.cols()]; grid.rows()];
        for (r, c, ty) in grid.iter() {
            cells[r][c] = ty;
        }
        Scene {
            cells,
            player: player.position(),
            facing_left: player.facing_left(),
            title: title.into(),
            message: String::new(),
            message_ticks: 0,
            pad_connected: false,
        }
    }

    pub fn apply_mutations(&mut self, mutations: &[CellMutation]) {
        for m in mutations {
            match self.cells.get_mut(m.row).and_then(|row| row.get_mut(m.col)) {
                Some(cell) => *cell = m.new,
                None => log::warn!("mutation ({}, {}) outside the scene", m.row, m.col),
            }
        }
    }

    pub fn apply(&mut self, report: &TickReport) {
        self.apply_mutations(&report.mutations);
        self.player = report.position;
        self.facing_left = report.facing_left;
        match report.teleport {
            Some(Teleport::PortalReset) => self.set_message("Portal! Back to the start"),
            Some(Teleport::FellOffMap) => self.set_message("Fell off the map"),
            None => {}
        }
    }

    /// Reposition the player without a tick (after restart).
    pub fn place_player(&mut self, player: &PlayerState) {
        self.player = player.position();
        self.facing_left = player.facing_left();
    }

    pub fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
        self.message_ticks = MESSAGE_TICKS;
    }

    /// Count down the message timer; call once per simulation tick.
    pub fn tick_message(&mut self) {
        if self.message_ticks > 0 {
            self.message_ticks -= 1;
            if self.message_ticks == 0 {
                self.message.clear();
            }
        }
    }

    pub fn set_pad_connected(&mut self, connected: bool) {
        self.pad_connected = connected;
    }

    /// Top status line: title, player coordinates, gamepad marker.
    fn hud_line(&self) -> String {
        let pad = if self.pad_connected { "  [PAD]" } else { "" };
        format!(
            " STARDUST  {}  ({:>2},{:>2}){pad} ",
            self.title, self.player.row, self.player.col
        )
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<CellType> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn player(&self) -> Position {
        self.player
    }
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so that
    /// inter-row gaps match the cell color on VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Glyphs ──

/// Each game cell = 2 terminal columns.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

fn cell_glyph(ty: CellType) -> (char, char, Color, Color) {
    match ty {
        CellType::Empty               => (' ', ' ', Color::Reset, Color::Reset),
        CellType::DestroyableStardust => ('▒', '▒', Color::Rgb { r: 230, g: 200, b: 120 }, Color::Rgb { r: 110, g: 90, b: 40 }),
        CellType::PermanentStardust   => ('█', '█', Color::Rgb { r: 120, g: 120, b: 140 }, Color::Rgb { r: 70, g: 70, b: 80 }),
        CellType::EntryPortal         => ('(', ')', Color::Rgb { r: 80, g: 220, b: 255 }, Color::Reset),
        CellType::ExitPortal          => ('(', ')', Color::Rgb { r: 255, g: 110, b: 220 }, Color::Reset),
        CellType::WarpPocket          => ('<', '>', Color::Rgb { r: 255, g: 230, b: 90 }, Color::Rgb { r: 50, g: 40, b: 0 }),
        CellType::PurpleStarWall      => ('▓', '▓', Color::Rgb { r: 170, g: 90, b: 220 }, Color::Rgb { r: 70, g: 30, b: 100 }),
        CellType::StarBlock           => ('*', '*', Color::Rgb { r: 255, g: 240, b: 150 }, Color::Rgb { r: 90, g: 80, b: 20 }),
        CellType::Fallwall            => ('▄', '▄', Color::Rgb { r: 240, g: 140, b: 60 }, Color::Rgb { r: 90, g: 45, b: 10 }),
        CellType::BlueStardust        => ('░', '░', Color::Rgb { r: 120, g: 170, b: 255 }, Color::Rgb { r: 30, g: 50, b: 120 }),
        CellType::GreenStardust       => ('═', '═', Color::Rgb { r: 120, g: 255, b: 140 }, Color::Rgb { r: 20, g: 90, b: 30 }),
    }
}

fn player_glyph(facing_left: bool) -> (char, char) {
    if facing_left { ('◄', '●') } else { ('●', '►') }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, scene: &Scene) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose(scene);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal's
        // native default and leave line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, scene: &Scene) {
        // ── HUD row ──
        let hud = scene.hud_line();
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Map ──
        let view_h = scene.rows().min(self.front.height.saturating_sub(MAP_ROW));
        let view_w = scene.cols().min(self.front.width / CELL_W);
        for r in 0..view_h {
            for c in 0..view_w {
                self.compose_cell(scene, r, c);
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + view_h + 1;
        if msg_row < self.front.height && !scene.message.is_empty() {
            let msg = format!(" ◈ {} ", scene.message);
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + view_h + 3;
        if help_row < self.front.height {
            let help = " ←/→:Move  Space:Place/Destroy  +↓/X:Down  +↑/C:Raise  F2:Restart  Esc:Quit";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Write the visual for game cell (r, c). Each game cell = 2 terminal columns.
    fn compose_cell(&mut self, scene: &Scene, r: usize, c: usize) {
        let col = c * CELL_W;
        let row = MAP_ROW + r;

        if scene.player == (Position { row: r, col: c }) {
            let (c0, c1) = player_glyph(scene.facing_left);
            let fg = Color::Rgb { r: 255, g: 255, b: 255 };
            self.front.set(col, row, Cell::new(c0, fg, Color::Reset));
            self.front.set(col + 1, row, Cell::new(c1, fg, Color::Reset));
            return;
        }

        let ty = scene.cell(r, c).unwrap_or_default();
        let (c0, c1, fg, bg) = cell_glyph(ty);
        self.front.set(col, row, Cell::new(c0, fg, bg));
        self.front.set(col + 1, row, Cell::new(c1, fg, bg));
    }
}
