#![no_main]

use libfuzzer_sys::fuzz_target;
use tls_session_cache::cache::store::SessionStore;
use tls_session_cache::core::session::ProtocolVersion;
use tls_session_cache::protocol::resumption::{ResumptionMatcher, ResumptionOffer};
use tls_session_cache::protocol::ticket::TicketKeys;

fuzz_target!(|data: &[u8]| {
    // Fixed key so inputs that start with the key name reach the AEAD
    let keys = TicketKeys::new([0x11; 16], &[0x22; 32]);
    let store = SessionStore::new(0);

    let split = data.first().map_or(0, |b| usize::from(*b % 33)).min(data.len());
    let (id, ticket) = data.split_at(split);
    let offer = ResumptionOffer::by_ticket(ticket, id, ProtocolVersion::Tls12);
    let _ = ResumptionMatcher::new(&store, b"fuzz")
        .with_ticket_decrypter(Some(&keys))
        .match_offer(&offer);
});
