//! Outbound order interface.
//!
//! The strategy produces [`OrderCommand`]s; the host forwards each one to an
//! [`OrderGateway`]. Sends are fire-and-forget: outcomes come back later as
//! exchange events, never as return values.

use std::io::{self, BufWriter, Write};

use chrono::{DateTime, Utc};
use pairmaker_core::{Lifespan, OrderCommand, OrderId, Price, Side};
use serde::Serialize;

use crate::error::AppResult;

/// Exchange-facing order operations.
#[cfg_attr(test, mockall::automock)]
pub trait OrderGateway {
    /// Place a new order on the primary instrument.
    fn insert_order(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        volume: u64,
        lifespan: Lifespan,
    ) -> AppResult<()>;

    /// Cancel a primary order.
    fn cancel_order(&mut self, id: OrderId) -> AppResult<()>;

    /// Send a hedge order on the secondary instrument.
    fn send_hedge_order(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        volume: u64,
    ) -> AppResult<()>;

    /// Push out everything sent since the last flush. Called once per
    /// handled event.
    fn flush(&mut self) -> AppResult<()>;
}

/// Forward one command to the gateway.
pub fn dispatch<G>(gateway: &mut G, command: &OrderCommand) -> AppResult<()>
where
    G: OrderGateway + ?Sized,
{
    match *command {
        OrderCommand::Insert {
            id,
            side,
            price,
            volume,
            lifespan,
        } => gateway.insert_order(id, side, price, volume, lifespan),
        OrderCommand::Cancel { id } => gateway.cancel_order(id),
        OrderCommand::Hedge {
            id,
            side,
            price,
            volume,
        } => gateway.send_hedge_order(id, side, price, volume),
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    ts: DateTime<Utc>,
    #[serde(flatten)]
    command: &'a OrderCommand,
}

/// Gateway that writes each command as one timestamped JSON line.
///
/// Lines are buffered until [`OrderGateway::flush`].
pub struct JsonLinesGateway<W: Write> {
    writer: W,
    written: u64,
}

impl JsonLinesGateway<BufWriter<io::Stdout>> {
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(io::stdout()))
    }
}

impl<W: Write> JsonLinesGateway<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of commands written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, command: OrderCommand) -> AppResult<()> {
        let envelope = Envelope {
            ts: Utc::now(),
            command: &command,
        };
        serde_json::to_writer(&mut self.writer, &envelope)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }
}

impl<W: Write> OrderGateway for JsonLinesGateway<W> {
    fn insert_order(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        volume: u64,
        lifespan: Lifespan,
    ) -> AppResult<()> {
        self.write(OrderCommand::Insert {
            id,
            side,
            price,
            volume,
            lifespan,
        })
    }

    fn cancel_order(&mut self, id: OrderId) -> AppResult<()> {
        self.write(OrderCommand::Cancel { id })
    }

    fn flush(&mut self) -> AppResult<()> {
        Ok(self.writer.flush()?)
    }

    fn send_hedge_order(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        volume: u64,
    ) -> AppResult<()> {
        self.write(OrderCommand::Hedge {
            id,
            side,
            price,
            volume,
        })
    }
}
