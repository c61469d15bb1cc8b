//! Pixy2 transactions
//!
//! Each operation encodes a request, then sends it and receives the reply
//! under one lock so concurrent callers never interleave on the bus.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{block_for, Instant};
use pixylink_hal::Link;
use pixylink_protocol::{
    ColorBlock, LineFeatureSet, LineFeatures, PacketType, Request, Response, VersionInfo, View,
    MAX_REQUEST_SIZE,
};

use crate::config::ClientConfig;
use crate::error::Error;

/// Blocking Pixy2 client over a [`Link`]
///
/// `M` picks the raw mutex guarding the link. The default suits links
/// shared with interrupts or other threads; use
/// [`NoopRawMutex`](embassy_sync::blocking_mutex::raw::NoopRawMutex) when
/// the client never leaves one execution context.
pub struct Pixy2<L, M: RawMutex = CriticalSectionRawMutex> {
    link: Mutex<M, RefCell<L>>,
    config: ClientConfig,
}

impl<L: Link, M: RawMutex> Pixy2<L, M> {
    /// Client with default settings
    pub fn new(link: L) -> Self {
        Self::with_config(link, ClientConfig::default())
    }

    pub fn with_config(link: L, config: ClientConfig) -> Self {
        Self {
            link: Mutex::new(RefCell::new(link)),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Direct access to the link; exclusive borrow means no transaction is running
    pub fn link_mut(&mut self) -> &mut L {
        self.link.get_mut().get_mut()
    }

    /// Tear down the client and hand back the link
    pub fn into_link(self) -> L {
        self.link.into_inner().into_inner()
    }

    /// Send `request` and receive the reply into `response`
    ///
    /// The lock is held from the first byte sent to the last byte received.
    /// `response` is empty if this returns an error.
    pub fn transact<const N: usize>(
        &self,
        request: &Request<N>,
        response: &mut Response,
    ) -> Result<(), Error<L::Error>> {
        let mut frame = [0u8; MAX_REQUEST_SIZE];
        let bytes = request.encode_max(&mut frame);
        let attempts = self.config.sync_attempts;
        response.clear();

        self.link.lock(|cell| {
            let mut link = cell.borrow_mut();
            trace!("sending {:?} request", request.packet_type());
            link.send(bytes).map_err(Error::Transport)?;
            response.receive(attempts, |buf| link.receive(buf))?;
            Ok(())
        })
    }

    /// Poll the firmware version until the sensor answers
    ///
    /// Timeouts, busy replies and transient bus errors mean the sensor is
    /// still booting and are retried every `retry_delay` until
    /// `startup_timeout` has passed, which yields [`Error::Timeout`]. Any other
    /// error is returned at once.
    pub fn wait_for_startup(&self) -> Result<VersionInfo, Error<L::Error>> {
        let deadline = Instant::now() + self.config.startup_timeout;
        let mut polls: u32 = 0;
        loop {
            polls += 1;
            match self.get_version() {
                Ok(version) => {
                    info!(
                        "pixy2 ready after {} polls, firmware {}.{}.{}",
                        polls,
                        version.fw_major,
                        version.fw_minor,
                        version.build()
                    );
                    return Ok(version);
                }
                Err(e) if e.is_not_ready() => {
                    if Instant::now() >= deadline {
                        warn!("pixy2 not ready after {} polls", polls);
                        return Err(Error::Timeout);
                    }
                    debug!("pixy2 not ready, poll {}", polls);
                    block_for(self.config.retry_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Query hardware and firmware versions
    pub fn get_version(&self) -> Result<VersionInfo, Error<L::Error>> {
        let mut response = Response::new();
        self.transact(&Request::empty(PacketType::GetVersion), &mut response)?;
        expect_type(&response, PacketType::VersionResponse)?;
        Ok(response.read(0))
    }

    /// Detected color blocks
    ///
    /// `signatures` is a bitmask of color signatures 1..=7 to report and
    /// `max_blocks` caps how many blocks the sensor sends. The returned view
    /// borrows `response`.
    pub fn get_objects<'r>(
        &self,
        signatures: u8,
        max_blocks: u8,
        response: &'r mut Response,
    ) -> Result<View<'r, ColorBlock>, Error<L::Error>> {
        let request = Request::new(PacketType::GetBlocks, [signatures, max_blocks]);
        self.transact(&request, response)?;
        let response: &'r Response = response;
        expect_type(response, PacketType::BlocksResponse)?;
        Ok(View::from_bytes(response.payload()))
    }

    /// Line-tracking features
    ///
    /// With `all_variants` the sensor reports every detected feature instead
    /// of only the main one.
    pub fn get_line_features<'r>(
        &self,
        features: LineFeatureSet,
        all_variants: bool,
        response: &'r mut Response,
    ) -> Result<LineFeatures<'r>, Error<L::Error>> {
        let request = Request::new(
            PacketType::GetLineFeatures,
            [u8::from(all_variants), features.bits()],
        );
        self.transact(&request, response)?;
        let response: &'r Response = response;
        expect_type(response, PacketType::LineFeaturesResponse)?;
        Ok(LineFeatures::parse(response.payload()))
    }
}

/// Map a reply of the wrong type to an error
///
/// The sensor's own error frame means it has nothing for us yet.
fn expect_type<E>(response: &Response, expected: PacketType) -> Result<(), Error<E>> {
    let actual = response.type_tag();
    if actual == expected.as_u8() {
        Ok(())
    } else if actual == PacketType::Error.as_u8() {
        debug!("pixy2 busy, wanted {:?}", expected);
        Err(Error::DeviceBusy)
    } else {
        error!("expected {:?} response, got {=u8:#x}", expected, actual);
        Err(Error::InvalidResponseType { expected, actual })
    }
}
