//! Message control records

use srt_sys::SrtMsgCtrl;

/// The fields of the managed `MsgCtrl` object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgCtrl {
    pub flags: i32,
    pub ttl: i32,
    pub in_order: bool,
    pub boundary: i32,
    pub src_time: i64,
    pub pkt_seq: i32,
    pub no: i32,
}

impl Default for MsgCtrl {
    fn default() -> Self {
        MsgCtrl::from(&SrtMsgCtrl::default())
    }
}

impl MsgCtrl {
    /// Fresh native record carrying every managed field
    pub fn to_native(&self) -> SrtMsgCtrl {
        SrtMsgCtrl {
            flags: self.flags,
            msgttl: self.ttl,
            inorder: i32::from(self.in_order),
            boundary: self.boundary,
            srctime: self.src_time,
            pktseq: self.pkt_seq,
            msgno: self.no,
            ..SrtMsgCtrl::default()
        }
    }

    /// Copy back what SRT filled in during the call
    pub fn update_from_native(&mut self, native: &SrtMsgCtrl) {
        *self = MsgCtrl::from(native);
    }
}

impl From<&SrtMsgCtrl> for MsgCtrl {
    fn from(native: &SrtMsgCtrl) -> Self {
        MsgCtrl {
            flags: native.flags,
            ttl: native.msgttl,
            in_order: native.inorder != 0,
            boundary: native.boundary,
            src_time: native.srctime,
            pkt_seq: native.pktseq,
            no: native.msgno,
        }
    }
}
