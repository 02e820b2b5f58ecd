mod account;
mod match_v5;
