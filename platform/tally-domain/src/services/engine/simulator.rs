use crate::entities::position::Position;
use crate::entities::risk::SimulationConfig;
use crate::error::SimulationError;
use crate::value_objects::action::Action;
use crate::value_objects::bar::Bar;
use crate::value_objects::reason::TradeReason;
use crate::value_objects::side::Side;
use crate::value_objects::trade::Trade;

/// Single-position, non-pyramiding state of one simulation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    LongOpen(Position),
    ShortOpen(Position),
}

impl PositionState {
    pub fn position(&self) -> Option<&Position> {
        match self {
            PositionState::Flat => None,
            PositionState::LongOpen(position) | PositionState::ShortOpen(position) => {
                Some(position)
            }
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    fn take(&mut self) -> Option<Position> {
        match std::mem::take(self) {
            PositionState::Flat => None,
            PositionState::LongOpen(position) | PositionState::ShortOpen(position) => {
                Some(position)
            }
        }
    }
}

/// Trades produced by a full pass plus whatever position was still open after the last bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub trades: Vec<Trade>,
    pub open_position: Option<Position>,
}

pub struct TradeSimulator {
    config: SimulationConfig,
    state: PositionState,
    trades: Vec<Trade>,
}

impl TradeSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            state: PositionState::Flat,
            trades: Vec::new(),
        }
    }

    /// Signal transition first, then the protective exit on the same bar's high/low.
    /// Returns the trade closed on this bar, if any. At most one trade can close per bar.
    pub fn on_bar(&mut self, bar: &Bar, action: Action) -> Option<&Trade> {
        let before = self.trades.len();
        self.apply_signal(bar, action);
        if !self.state.is_flat() {
            self.apply_protective_exit(bar);
        }
        if self.trades.len() > before {
            self.trades.last()
        } else {
            None
        }
    }

    fn apply_signal(&mut self, bar: &Bar, action: Action) {
        match (&self.state, action) {
            (PositionState::Flat, Action::Buy) => {
                self.state = PositionState::LongOpen(self.open_position(Side::Long, bar));
            }
            (PositionState::Flat, Action::Sell) => {
                self.state = PositionState::ShortOpen(self.open_position(Side::Short, bar));
            }
            (PositionState::LongOpen(_), Action::Sell) => {
                self.close(bar.timestamp, bar.close, TradeReason::StrategySignal);
            }
            // Reversals and repeats are ignored.
            _ => {}
        }
    }

    fn apply_protective_exit(&mut self, bar: &Bar) {
        let Some(position) = self.state.position() else {
            return;
        };

        let mut exit: Option<(f64, TradeReason)> = None;
        let stop = position.stop_price(self.config.stop_loss_pct);
        let target = position.target_price(self.config.take_profit_pct);
        match position.side {
            Side::Long => {
                if let Some(stop) = stop.filter(|price| bar.low <= *price) {
                    exit = Some((stop, TradeReason::StopLoss));
                }
                if let Some(target) = target.filter(|price| bar.high >= *price) {
                    exit = Some((target, TradeReason::TakeProfit));
                }
            }
            Side::Short => {
                if let Some(stop) = stop.filter(|price| bar.high >= *price) {
                    exit = Some((stop, TradeReason::StopLoss));
                }
                if let Some(target) = target.filter(|price| bar.low <= *price) {
                    exit = Some((target, TradeReason::TakeProfit));
                }
            }
        }

        // A non-positive exit price only arises from a percentage >= 100 and never fills.
        if let Some((price, reason)) = exit.filter(|(price, _)| *price > 0.0) {
            self.close(bar.timestamp, price, reason);
        }
    }

    fn open_position(&self, side: Side, bar: &Bar) -> Position {
        Position::open(side, bar.timestamp, bar.close, self.config.position_size)
    }

    fn close(&mut self, timestamp: i64, price: f64, reason: TradeReason) {
        if let Some(position) = self.state.take() {
            self.trades.push(position.close(timestamp, price, reason));
        }
    }

    pub fn finish(self) -> SimulationOutcome {
        SimulationOutcome {
            open_position: self.state.position().cloned(),
            trades: self.trades,
        }
    }
}

pub fn simulate_with_outcome(
    bars: &[Bar],
    signals: &[Action],
    config: SimulationConfig,
) -> Result<SimulationOutcome, SimulationError> {
    if bars.len() != signals.len() {
        return Err(SimulationError::LengthMismatch {
            bars: bars.len(),
            signals: signals.len(),
        });
    }

    let mut simulator = TradeSimulator::new(config);
    for (bar, action) in bars.iter().zip(signals.iter().copied()) {
        simulator.on_bar(bar, action);
    }
    Ok(simulator.finish())
}

/// Turns index-aligned bars and actions into the closed-trade log.
pub fn simulate(
    bars: &[Bar],
    signals: &[Action],
    config: SimulationConfig,
) -> Result<Vec<Trade>, SimulationError> {
    simulate_with_outcome(bars, signals, config).map(|outcome| outcome.trades)
}
