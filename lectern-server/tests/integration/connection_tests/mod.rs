mod test_announce_ack;
