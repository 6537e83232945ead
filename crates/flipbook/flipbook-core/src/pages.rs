//! Page model: the ordered stack of pages and the committed spread index.
//!
//! `commit_flip` and `go_to` are the only mutators of the index.

use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::Layout;
use crate::error::FlipError;
use crate::ids::{IdAllocator, PageId};
use crate::state::{Direction, Reading, Side};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    /// Ordinal in reading order.
    pub index: usize,
    /// Opaque content reference (e.g. an image URL). `None` renders blank.
    pub content: Option<String>,
    pub side: Side,
}

/// Pages visible face-up, by physical side of the spine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spread {
    pub index: usize,
    pub left: Option<PageId>,
    pub right: Option<PageId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub from_index: usize,
    pub to_index: usize,
}

/// Pages carried by a flip: the one lifting off its stack and the one that
/// lands face-up on the other side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurningPages {
    pub leaving: Option<PageId>,
    pub arriving: Option<PageId>,
}

#[derive(Debug, Default)]
pub struct PageModel {
    ids: IdAllocator,
    pages: Vec<Page>,
    by_id: HashMap<PageId, usize>,
    layout: Layout,
    reading: Reading,
    index: usize,
}

impl PageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the book's content and open at the spread holding `start_page`.
    pub fn initialize<I>(
        &mut self,
        contents: I,
        layout: Layout,
        reading: Reading,
        start_page: usize,
    ) -> Result<(), FlipError>
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let contents: Vec<Option<String>> = contents.into_iter().collect();
        if contents.is_empty() {
            return Err(FlipError::EmptyBook);
        }

        self.pages.clear();
        self.by_id.clear();
        for (index, content) in contents.into_iter().enumerate() {
            let id = self.ids.alloc_page();
            self.by_id.insert(id, index);
            self.pages.push(Page {
                id,
                index,
                content,
                side: Side::Front,
            });
        }
        self.layout = layout;
        self.reading = reading;
        let last = self.pages.len() - 1;
        self.index = self.spread_for_page(start_page.min(last));
        self.refresh_sides();
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.by_id.get(&id).and_then(|&i| self.pages.get(i))
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Committed spread index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn spread_count(&self) -> usize {
        let n = self.pages.len();
        match self.layout {
            _ if n == 0 => 0,
            Layout::Single => n,
            Layout::Double => 1 + n / 2,
        }
    }

    /// Spread that shows page ordinal `page`.
    pub fn spread_for_page(&self, page: usize) -> usize {
        match self.layout {
            Layout::Single => page,
            Layout::Double => (page + 1) / 2,
        }
    }

    pub fn current_spread(&self) -> Spread {
        self.spread_at(self.index)
    }

    pub fn spread(&self, index: usize) -> Option<Spread> {
        (index < self.spread_count()).then(|| self.spread_at(index))
    }

    pub fn can_flip(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.index + 1 < self.spread_count(),
            Direction::Backward => self.index > 0,
        }
    }

    /// Index the book would show after flipping in `direction`.
    pub fn neighbour(&self, direction: Direction) -> Option<usize> {
        if !self.can_flip(direction) {
            return None;
        }
        Some(match direction {
            Direction::Forward => self.index + 1,
            Direction::Backward => self.index - 1,
        })
    }

    pub fn commit_flip(&mut self, direction: Direction) -> Result<CommitOutcome, FlipError> {
        let Some(to_index) = self.neighbour(direction) else {
            warn!(
                "refusing {} flip at spread {} of {}",
                direction.as_str(),
                self.index,
                self.spread_count()
            );
            return Err(self.out_of_range(direction));
        };
        Ok(self.move_to(to_index))
    }

    /// Jump straight to `spread`.
    pub fn go_to(&mut self, spread: usize) -> Result<CommitOutcome, FlipError> {
        if spread >= self.spread_count() {
            let direction = if spread > self.index {
                Direction::Forward
            } else {
                Direction::Backward
            };
            return Err(self.out_of_range(direction));
        }
        Ok(self.move_to(spread))
    }

    /// Pages involved when flipping away from the current spread in `direction`.
    pub fn turning_pages(&self, direction: Direction) -> TurningPages {
        let Some(next) = self.neighbour(direction) else {
            return TurningPages::default();
        };
        let (cur_back, cur_fwd) = self.slots(self.index);
        let (next_back, next_fwd) = self.slots(next);
        let id = |ordinal: Option<usize>| ordinal.map(|i| self.pages[i].id);
        match (self.layout, direction) {
            (Layout::Single, Direction::Forward) => TurningPages {
                leaving: id(cur_fwd),
                arriving: None,
            },
            (Layout::Single, Direction::Backward) => TurningPages {
                leaving: None,
                arriving: id(next_fwd),
            },
            (Layout::Double, Direction::Forward) => TurningPages {
                leaving: id(cur_fwd),
                arriving: id(next_back),
            },
            (Layout::Double, Direction::Backward) => TurningPages {
                leaving: id(cur_back),
                arriving: id(next_fwd),
            },
        }
    }

    fn move_to(&mut self, to_index: usize) -> CommitOutcome {
        let outcome = CommitOutcome {
            from_index: self.index,
            to_index,
        };
        self.index = to_index;
        self.refresh_sides();
        outcome
    }

    fn out_of_range(&self, direction: Direction) -> FlipError {
        FlipError::OutOfRange {
            index: self.index,
            direction,
            spreads: self.spread_count(),
        }
    }

    /// Page ordinals of a spread in reading order: (backward side, forward side).
    fn slots(&self, index: usize) -> (Option<usize>, Option<usize>) {
        let n = self.pages.len();
        let within = |i: usize| (i < n).then_some(i);
        match self.layout {
            Layout::Single => (None, within(index)),
            Layout::Double if index == 0 => (None, within(0)),
            Layout::Double => (within(2 * index - 1), within(2 * index)),
        }
    }

    fn spread_at(&self, index: usize) -> Spread {
        let (back, fwd) = self.slots(index);
        let back = back.map(|i| self.pages[i].id);
        let fwd = fwd.map(|i| self.pages[i].id);
        let (left, right) = match self.reading {
            Reading::LeftToRight => (back, fwd),
            Reading::RightToLeft => (fwd, back),
        };
        Spread { index, left, right }
    }

    /// Pages before the first forward-side page of the current spread are flipped over.
    fn refresh_sides(&mut self) {
        let boundary = match self.layout {
            Layout::Single => self.index,
            Layout::Double => 2 * self.index,
        };
        for page in &mut self.pages {
            page.side = if page.index < boundary {
                Side::Back
            } else {
                Side::Front
            };
        }
    }
}
