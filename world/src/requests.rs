//! Order queue, delivery resolution, and random order generation.

use crop_rivals_core::{CompletionAward, CropType, Level, OrderLine, OrderSpec, Side};
use rand::{seq::SliceRandom, Rng};

use crate::{level, scoring};

/// Largest number of distinct crops a single order may ask for.
const MAX_LINES_PER_ORDER: usize = 3;

/// One crop line of a request together with its delivery bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestItem {
    crop: CropType,
    remaining: u32,
    initial: u32,
    contributions: [u32; 2],
}

impl RequestItem {
    fn from_line(line: OrderLine) -> Self {
        Self {
            crop: line.crop,
            remaining: line.quantity,
            initial: line.quantity,
            contributions: [0; 2],
        }
    }

    /// Requested crop.
    #[must_use]
    pub const fn crop(&self) -> CropType {
        self.crop
    }

    /// Units still outstanding.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Units demanded when the request was created.
    #[must_use]
    pub const fn initial(&self) -> u32 {
        self.initial
    }

    /// Units the provided side delivered for this line.
    #[must_use]
    pub const fn contribution(&self, side: Side) -> u32 {
        self.contributions[side.index()]
    }
}

/// A customer order the agents compete to fill.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    items: Vec<RequestItem>,
    completed: bool,
}

impl Request {
    /// Creates an open request from an order description.
    #[must_use]
    pub fn from_order(order: &OrderSpec) -> Self {
        Self {
            items: order.lines().iter().copied().map(RequestItem::from_line).collect(),
            completed: false,
        }
    }

    /// Lines of the request.
    #[must_use]
    pub fn items(&self) -> &[RequestItem] {
        &self.items
    }

    /// Reports whether the completion bonus was already granted.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Reports whether every line has been delivered in full.
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        self.items.iter().all(|item| item.remaining == 0)
    }

    /// Sum of the quantities demanded at creation.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.initial).sum()
    }

    /// Units delivered by the provided side across every line.
    #[must_use]
    pub fn delivered_by(&self, side: Side) -> u32 {
        self.items.iter().map(|item| item.contribution(side)).sum()
    }

    /// Line with the largest outstanding quantity, preferring the earliest on ties.
    #[must_use]
    pub fn most_needed(&self) -> Option<&RequestItem> {
        self.items
            .iter()
            .filter(|item| item.remaining > 0)
            .fold(None, |best: Option<&RequestItem>, item| match best {
                Some(current) if current.remaining >= item.remaining => Some(current),
                _ => Some(item),
            })
    }

    fn deliver(&mut self, side: Side, crop: CropType) -> bool {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.crop == crop && item.remaining > 0)
        else {
            return false;
        };
        item.remaining -= 1;
        item.contributions[side.index()] += 1;
        true
    }

    /// Grants the completion bonus at most once, once every line is delivered.
    fn complete(&mut self) -> Option<CompletionAward> {
        if self.completed || !self.is_fulfilled() {
            return None;
        }
        self.completed = true;
        Some(scoring::completion_award(
            self.total_quantity(),
            self.delivered_by(Side::Player),
            self.delivered_by(Side::Ai),
        ))
    }
}

/// Result of handing a product over at the market.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// The current request needed the crop.
    Accepted {
        /// Zero-based position of the request in the queue.
        request: usize,
    },
    /// The crop was not needed, or no request is open.
    Rejected,
}

/// Request completion reported by the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Zero-based position of the completed request.
    pub request: usize,
    /// Bonus granted for the completion.
    pub award: CompletionAward,
    /// Whether the queue has no further requests.
    pub exhausted: bool,
}

/// Ordered queue of requests with a cursor on the one currently served.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestLedger {
    requests: Vec<Request>,
    current: usize,
}

impl RequestLedger {
    /// Queues requests built from the provided orders.
    #[must_use]
    pub fn new(orders: &[OrderSpec]) -> Self {
        Self {
            requests: orders.iter().map(Request::from_order).collect(),
            current: 0,
        }
    }

    /// Every queued request, including completed ones.
    #[must_use]
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Position of the request currently served.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Request currently served, or `None` once the queue is exhausted.
    #[must_use]
    pub fn current(&self) -> Option<&Request> {
        self.requests.get(self.current)
    }

    /// Reports whether every queued request has been completed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current >= self.requests.len()
    }

    /// Counts one unit of the crop toward the current request.
    pub fn deliver(&mut self, side: Side, crop: CropType) -> Delivery {
        let request = self.current;
        let Some(open) = self.requests.get_mut(request) else {
            return Delivery::Rejected;
        };
        if open.deliver(side, crop) {
            Delivery::Accepted { request }
        } else {
            Delivery::Rejected
        }
    }

    /// Completes the current request if fulfilled and advances the queue.
    ///
    /// Returns `None` when the request still has outstanding units or when its
    /// bonus was already granted.
    pub fn try_complete(&mut self) -> Option<Completion> {
        let request = self.current;
        let award = self.requests.get_mut(request)?.complete()?;
        self.current += 1;
        Some(Completion {
            request,
            award,
            exhausted: self.is_exhausted(),
        })
    }
}

/// Draws a random order for the provided level.
///
/// Between one and three distinct allowed crops are picked, each with a
/// quantity drawn uniformly from one to the level's maximum.
pub fn make_random_request<R: Rng>(level: Level, rng: &mut R) -> OrderSpec {
    let mut crops = level::allowed_crops(level).to_vec();
    let max_lines = crops.len().min(MAX_LINES_PER_ORDER);
    if max_lines == 0 {
        return OrderSpec::default();
    }

    let count = rng.gen_range(1..=max_lines);
    crops.shuffle(rng);
    crops.truncate(count);

    let max_quantity = level::max_quantity(level);
    let lines = crops
        .into_iter()
        .map(|crop| OrderLine {
            crop,
            quantity: rng.gen_range(1..=max_quantity),
        })
        .collect();
    OrderSpec::new(lines)
}

/// Draws the full order queue for a match at the provided level.
pub fn generate_orders<R: Rng>(level: Level, rng: &mut R) -> Vec<OrderSpec> {
    (0..level::request_count(level))
        .map(|_| make_random_request(level, rng))
        .collect()
}
