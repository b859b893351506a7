//! `SRT_TRACEBSTATS`, the record filled by `srt_bstats` and `srt_bistats`

/// One counter, at the width libsrt stores it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Int(i32),
    Long(i64),
    Double(f64),
}

impl From<i32> for StatValue {
    fn from(v: i32) -> Self {
        StatValue::Int(v)
    }
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Long(v)
    }
}

/// Byte counters are unsigned in C; the managed side only has signed longs
impl From<u64> for StatValue {
    fn from(v: u64) -> Self {
        StatValue::Long(v as i64)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Double(v)
    }
}

macro_rules! trace_bstats {
    ($($field:ident: $ty:ty,)*) => {
        /// `SRT_TRACEBSTATS` (`struct CBytePerfMon` in `srt.h`)
        ///
        /// Field order and widths must match the C declaration. Field names
        /// are the C names, which are also the managed property names.
        #[repr(C)]
        #[allow(non_snake_case)]
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct SrtTraceBStats {
            $(pub $field: $ty,)*
            /// Room for counters a newer libsrt appends
            pub _tail: [u64; 32],
        }

        impl Default for SrtTraceBStats {
            fn default() -> Self {
                SrtTraceBStats {
                    $($field: Default::default(),)*
                    _tail: [0; 32],
                }
            }
        }

        impl SrtTraceBStats {
            /// C field names, in declaration order
            pub const FIELDS: &'static [&'static str] = &[$(stringify!($field),)*];

            /// Every counter, in declaration order
            pub fn values(&self) -> Vec<(&'static str, StatValue)> {
                vec![$((stringify!($field), StatValue::from(self.$field)),)*]
            }
        }
    };
}

trace_bstats! {
    // global measurements
    msTimeStamp: i64,
    pktSentTotal: i64,
    pktRecvTotal: i64,
    pktSndLossTotal: i32,
    pktRcvLossTotal: i32,
    pktRetransTotal: i32,
    pktSentACKTotal: i32,
    pktRecvACKTotal: i32,
    pktSentNAKTotal: i32,
    pktRecvNAKTotal: i32,
    usSndDurationTotal: i64,
    pktSndDropTotal: i32,
    pktRcvDropTotal: i32,
    pktRcvUndecryptTotal: i32,
    byteSentTotal: u64,
    byteRecvTotal: u64,
    byteRcvLossTotal: u64,
    byteRetransTotal: u64,
    byteSndDropTotal: u64,
    byteRcvDropTotal: u64,
    byteRcvUndecryptTotal: u64,

    // local measurements
    pktSent: i64,
    pktRecv: i64,
    pktSndLoss: i32,
    pktRcvLoss: i32,
    pktRetrans: i32,
    pktRcvRetrans: i32,
    pktSentACK: i32,
    pktRecvACK: i32,
    pktSentNAK: i32,
    pktRecvNAK: i32,
    mbpsSendRate: f64,
    mbpsRecvRate: f64,
    usSndDuration: i64,
    pktReorderDistance: i32,
    pktRcvAvgBelatedTime: f64,
    pktRcvBelated: i64,
    pktSndDrop: i32,
    pktRcvDrop: i32,
    pktRcvUndecrypt: i32,
    byteSent: u64,
    byteRecv: u64,
    byteRcvLoss: u64,
    byteRetrans: u64,
    byteSndDrop: u64,
    byteRcvDrop: u64,
    byteRcvUndecrypt: u64,

    // instant measurements
    usPktSndPeriod: f64,
    pktFlowWindow: i32,
    pktCongestionWindow: i32,
    pktFlightSize: i32,
    msRTT: f64,
    mbpsBandwidth: f64,
    byteAvailSndBuf: i32,
    byteAvailRcvBuf: i32,
    mbpsMaxBW: f64,
    byteMSS: i32,
    pktSndBuf: i32,
    byteSndBuf: i32,
    msSndBuf: i32,
    msSndTsbPdDelay: i32,
    pktRcvBuf: i32,
    byteRcvBuf: i32,
    msRcvBuf: i32,
    msRcvTsbPdDelay: i32,
    pktSndFilterExtraTotal: i32,
    pktRcvFilterExtraTotal: i32,
    pktRcvFilterSupplyTotal: i32,
    pktRcvFilterLossTotal: i32,
    pktSndFilterExtra: i32,
    pktRcvFilterExtra: i32,
    pktRcvFilterSupply: i32,
    pktRcvFilterLoss: i32,
    pktReorderTolerance: i32,

    // unique (non-retransmitted) traffic
    pktSentUniqueTotal: i64,
    pktRecvUniqueTotal: i64,
    byteSentUniqueTotal: u64,
    byteRecvUniqueTotal: u64,
    pktSentUnique: i64,
    pktRecvUnique: i64,
    byteSentUnique: u64,
    byteRecvUnique: u64,
}
