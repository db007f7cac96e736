mod cascade_test;
mod e2e_test;
mod replay_test;
