//! Integration tests: peer-filtered UDP reads and AAC RTP framing over
//! real loopback sockets.
//!
//! Each test binds an ephemeral port and talks to it from plain
//! `std::net::UdpSocket` peers, so the peer filter, the buffer ring,
//! and close semantics see actual datagram I/O.

use std::io::ErrorKind;
use std::net::UdpSocket;
use std::thread;
use std::time::Duration;

use rtsp_client::{AacPacketizer, ClientError, RtpPacket, UdpPeerListener};

#[test]
fn read_skips_datagrams_from_other_sources() {
    let mut listener = UdpPeerListener::bind(0, 4).expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();

    let peer = UdpSocket::bind("127.0.0.1:0").expect("bind peer");
    let stranger = UdpSocket::bind("127.0.0.1:0").expect("bind stranger");
    listener.set_peer(peer.local_addr().unwrap());

    stranger
        .send_to(b"noise", ("127.0.0.1", port))
        .expect("stranger send");
    stranger
        .send_to(b"more noise", ("127.0.0.1", port))
        .expect("stranger send");
    peer.send_to(b"media", ("127.0.0.1", port))
        .expect("peer send");

    let datagram = listener.read().expect("read");
    assert_eq!(datagram, b"media");
}

#[test]
fn read_skips_datagrams_arriving_before_the_peer_is_set() {
    let mut listener = UdpPeerListener::bind(0, 4).expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();

    let peer = UdpSocket::bind("127.0.0.1:0").expect("bind peer");
    let peer_addr = peer.local_addr().unwrap();
    peer.send_to(b"early", ("127.0.0.1", port))
        .expect("early send");

    let handle = listener.handle();
    let setter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        handle.set_peer(peer_addr);
        peer.send_to(b"late", ("127.0.0.1", port)).expect("late send");
    });

    // the read loop consumes "early" while no peer is known yet, then
    // blocks until the other thread names the peer and sends again
    let datagram = listener.read().expect("read");
    assert_eq!(datagram, b"late");
    setter.join().unwrap();
}

#[test]
fn write_reaches_the_peer() {
    let listener = UdpPeerListener::bind(0, 4).expect("bind listener");
    let peer = UdpSocket::bind("127.0.0.1:0").expect("bind peer");
    peer.set_read_timeout(Some(Duration::from_secs(2)))
        .expect("peer timeout");
    listener.set_peer(peer.local_addr().unwrap());

    let sent = listener.write(b"keepalive").expect("write");
    assert_eq!(sent, 9);

    let mut buf = [0u8; 64];
    let (len, from) = peer.recv_from(&mut buf).expect("peer recv");
    assert_eq!(&buf[..len], b"keepalive");
    assert_eq!(
        from.port(),
        listener.local_addr().expect("local addr").port()
    );
}

#[test]
fn close_unblocks_a_blocked_read() {
    let mut listener = UdpPeerListener::bind(0, 4).expect("bind listener");
    let peer = UdpSocket::bind("127.0.0.1:0").expect("bind peer");
    listener.set_peer(peer.local_addr().unwrap());

    let handle = listener.handle();
    let closer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        handle.close();
    });

    // no datagrams in flight, so this blocks until the other thread
    // flips the closed flag
    let err = listener.read().expect_err("read after close");
    match err {
        ClientError::Io(source) => assert_eq!(source.kind(), ErrorKind::NotConnected),
        other => panic!("unexpected error: {other}"),
    }
    closer.join().unwrap();
}

#[test]
fn packetized_audio_survives_the_trip() {
    let mut listener = UdpPeerListener::bind(0, 4).expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();

    let server = UdpSocket::bind("127.0.0.1:0").expect("bind server");
    listener.set_peer(server.local_addr().unwrap());

    let mut packetizer = AacPacketizer::new(0, &[0x12, 0x10]).expect("packetizer");
    let access_unit = vec![0x21u8; 240];
    let frames = packetizer
        .packetize(&access_unit, Duration::ZERO)
        .expect("packetize");
    assert_eq!(frames.len(), 1);
    for frame in &frames {
        server
            .send_to(frame, ("127.0.0.1", port))
            .expect("server send");
    }

    let datagram = listener.read().expect("read frame");
    let packet = RtpPacket::parse(datagram).expect("parse rtp");
    assert_eq!(packet.header.payload_type, 96);
    assert!(packet.header.marker);

    let units = AacPacketizer::extract_access_units(&packet.payload).expect("extract");
    assert_eq!(units, vec![access_unit]);
}

#[test]
fn buffer_ring_wraps_across_reads() {
    // two slots force the third read onto a reused buffer
    let mut listener = UdpPeerListener::bind(0, 2).expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();
    let peer = UdpSocket::bind("127.0.0.1:0").expect("bind peer");
    listener.set_peer(peer.local_addr().unwrap());

    for message in [&b"first"[..], b"second", b"third"] {
        peer.send_to(message, ("127.0.0.1", port)).expect("send");
        let datagram = listener.read().expect("read");
        assert_eq!(datagram, message);
    }
}
