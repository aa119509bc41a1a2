mod test_relay_targeting;
mod test_screen_share_broadcast;
