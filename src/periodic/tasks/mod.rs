pub(crate) mod proof_push;
