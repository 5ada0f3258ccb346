use crate::value_objects::action::Action;
use crate::value_objects::bar::Bar;

/// Where a bar sits in the series being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarContext {
    pub index: usize,
    pub total: usize,
}

impl BarContext {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}

pub trait Strategy {
    fn on_bar(&mut self, _bar: &Bar, _ctx: BarContext) -> Action {
        Action::Hold
    }
}

/// Runs `strategy` over `bars`, producing one action per bar.
pub fn generate_signals(strategy: &mut dyn Strategy, bars: &[Bar]) -> Vec<Action> {
    let total = bars.len();
    bars.iter()
        .enumerate()
        .map(|(index, bar)| strategy.on_bar(bar, BarContext { index, total }))
        .collect()
}

pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    // A single-bar series only gets the Buy.
    fn on_bar(&mut self, _bar: &Bar, ctx: BarContext) -> Action {
        if ctx.is_first() {
            Action::Buy
        } else if ctx.is_last() {
            Action::Sell
        } else {
            Action::Hold
        }
    }
}

pub struct SmaCrossover {
    short_window: usize,
    long_window: usize,
    prices: Vec<f64>,
    previous_spread: Option<f64>,
}

impl SmaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        Self {
            short_window,
            long_window,
            prices: Vec::new(),
            previous_spread: None,
        }
    }

    fn sma(&self, window: usize) -> Option<f64> {
        if self.prices.len() < window || window == 0 {
            return None;
        }
        let slice = &self.prices[self.prices.len() - window..];
        Some(slice.iter().sum::<f64>() / window as f64)
    }
}

impl Strategy for SmaCrossover {
    fn on_bar(&mut self, bar: &Bar, _ctx: BarContext) -> Action {
        self.prices.push(bar.close);
        let (Some(short), Some(long)) = (self.sma(self.short_window), self.sma(self.long_window))
        else {
            return Action::Hold;
        };

        let spread = short - long;
        let action = match self.previous_spread {
            Some(previous) if previous <= 0.0 && spread > 0.0 => Action::Buy,
            Some(previous) if previous >= 0.0 && spread < 0.0 => Action::Sell,
            _ => Action::Hold,
        };
        self.previous_spread = Some(spread);
        action
    }
}

pub struct HoldStrategy;

impl Strategy for HoldStrategy {
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyKind {
    BuyAndHold,
    SmaCrossover { short: usize, long: usize },
    Hold,
    Scripted(Vec<Action>),
}

impl StrategyKind {
    /// One action per bar for generated sources. A recorded list comes back
    /// unchanged, so a length mismatch still reaches the simulator's check.
    pub fn signals_for(&self, bars: &[Bar]) -> Vec<Action> {
        let mut strategy: Box<dyn Strategy> = match self {
            StrategyKind::Scripted(actions) => return actions.clone(),
            StrategyKind::BuyAndHold => Box::new(BuyAndHold),
            StrategyKind::SmaCrossover { short, long } => Box::new(SmaCrossover::new(*short, *long)),
            StrategyKind::Hold => Box::new(HoldStrategy),
        };
        generate_signals(strategy.as_mut(), bars)
    }
}
