//! Contract interfaces
//!
//! Minimal inline ABIs for the three on-chain collaborators: the Kyber
//! proxy (rate aggregator), the Uniswap V2 pair (AMM reserves), and the
//! deployed flash-loan contract. Nothing here is reimplemented; these
//! are read-only views plus one transaction entry point.

use ethers::prelude::abigen;

abigen!(
    IKyberNetworkProxy,
    r#"[
        function getExpectedRate(address src, address dest, uint256 srcQty) external view returns (uint256 expectedRate, uint256 slippageRate)
    ]"#
);

abigen!(
    IUniswapV2Pair,
    r#"[
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)
        function token0() external view returns (address)
        function token1() external view returns (address)
    ]"#
);

abigen!(
    IFlashloan,
    r#"[
        function initiateFlashLoan(address solo, address token, uint256 amount, uint256 direction) external
    ]"#
);
